//! JSON web API for payer-name resolution.
//!
//! The address directory is loaded once at startup and shared read-only
//! between requests.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! payer-match serve --directory adressen.csv
//!
//! # Custom port and threshold
//! payer-match serve -d adressen.csv --port 3000 --threshold 85
//! ```
//!
//! ## API Endpoints
//!
//! - `POST /api/resolve` - Resolve `{"names": [...], "threshold": 85}`
//! - `POST /api/compare` - Score `{"a": "...", "b": "..."}`
//! - `GET /api/directory` - Record counts and active threshold
//! - `GET /api/directory?q=schmidt` - Also lists records whose name or address contains the term
//! - `GET /api/health` - Liveness check

pub mod server;

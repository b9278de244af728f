//! Flat-file dialects exchanged with the medication-history clearinghouse.
//!
//! Each dialect is a static [`FileSchema`](medhx_codec::FileSchema) plus typed
//! header, detail and footer records:
//!
//! - [`patient_load`]: outgoing patient enrollment (`PMA`) files
//! - [`verification`]: incoming acknowledgement of a patient load file
//! - [`response`]: incoming flat-file medication history
//!
//! # Example
//!
//! ```
//! use medhx_dialects::verification::{self, LoadStatus};
//!
//! let file = b"HDR|3.0|ACME|S00000000000001|lmq3k0a1x2acme|lmq3k0a1x2|20250101|10000000|PMA|U|ADHOC|01|File loaded successfully.|20250102\nTRL|1|0|1|0\n";
//! let parsed = verification::parse(file).unwrap();
//! assert_eq!(parsed.header.data.load_status, LoadStatus::Loaded);
//! assert!(parsed.details.is_empty());
//! ```

pub mod codes;
pub mod patient_load;
pub mod response;
pub mod verification;

pub use medhx_codec::{CodecError, DecodedRow, OnRowError, ParsedFile, RejectedRow};

/// Current file format version.
pub const VERSION: &str = "3.0";

/// Format versions accepted on incoming acknowledgements.
pub const ACCEPTED_VERSIONS: &[&str] = &["3.0", "2.2"];

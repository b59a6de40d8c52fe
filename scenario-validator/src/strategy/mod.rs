//! Validation source strategies.
//!
//! Only the filesystem strategy (`fs` module) exists. The rule engine works on
//! raw text plus a loaded document, so another source would only need to
//! produce those two values.

pub mod fs;

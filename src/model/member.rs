use serde::{Deserialize, Serialize};

/// A member of the organization as listed by the system of record. Members are never changed
/// locally; the client only reads them to take dues payments.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Student number, unique per member.
    pub nim: String,
    /// Full name.
    pub nama: String,
    /// Class or cohort label, e.g. `SI-A`.
    pub kelas: String,
}

impl Member {
    pub fn new(nim: impl Into<String>, nama: impl Into<String>, kelas: impl Into<String>) -> Self {
        Self {
            nim: nim.into(),
            nama: nama.into(),
            kelas: kelas.into(),
        }
    }
}

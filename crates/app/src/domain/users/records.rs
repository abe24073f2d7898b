//! User Records

use jiff::Timestamp;

use crate::{
    domain::users::password::Password,
    ids::TypedId,
    versioning::{Version, Versioned},
};

/// User ID
pub type UserId = TypedId<UserRecord>;

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub created_at: Timestamp,
    pub name: String,
    pub email: String,
    pub password: Password,
    pub activated: bool,
    pub version: Version,
}

impl Versioned for UserRecord {
    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

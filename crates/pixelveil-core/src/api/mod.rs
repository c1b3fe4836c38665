use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};

use pixelveil_crypto::{key_file, KeyMaterial, Salt};

use crate::media::CarrierImage;
use crate::result::Result;

pub mod extract;
pub mod hide;

/// Where a request takes its carrier from
#[derive(Debug, Clone)]
pub enum CarrierSource {
    Image(CarrierImage),
    File(PathBuf),
}

impl CarrierSource {
    pub(crate) fn load(self) -> Result<CarrierImage> {
        match self {
            CarrierSource::Image(image) => Ok(image),
            CarrierSource::File(path) => CarrierImage::open(path),
        }
    }
}

/// Where a request takes its key pair from
#[derive(Clone)]
pub enum KeySource {
    Keys(KeyMaterial),
    /// derived on execution
    Password { password: String, salt: Salt },
    /// plain key files ignore the password
    KeyFile {
        path: PathBuf,
        password: Option<String>,
    },
}

impl Debug for KeySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            KeySource::Password { salt, .. } => f
                .debug_struct("Password")
                .field("password", &"***")
                .field("salt", salt)
                .finish(),
            KeySource::KeyFile { path, password } => f
                .debug_struct("KeyFile")
                .field("path", path)
                .field("password", &password.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

impl KeySource {
    pub(crate) fn resolve(self) -> Result<KeyMaterial> {
        match self {
            KeySource::Keys(keys) => Ok(keys),
            KeySource::Password { password, salt } => {
                Ok(pixelveil_crypto::derive(&password, &salt)?)
            }
            KeySource::KeyFile { path, password } => {
                Ok(key_file::load_from_file(&path, password.as_deref())?)
            }
        }
    }

    pub(crate) fn key_file(path: &Path, password: Option<&str>) -> Self {
        KeySource::KeyFile {
            path: path.to_path_buf(),
            password: password.map(str::to_string),
        }
    }
}

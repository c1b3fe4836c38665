use std::path::{Path, PathBuf};

use pixelveil_crypto::{KeyMaterial, Salt};

use super::{CarrierSource, KeySource};
use crate::media::CarrierImage;
use crate::{CancellationToken, PixelveilError, Result, SequenceOptions};

pub fn prepare() -> HideApi {
    HideApi::default()
}

#[derive(Default, Debug)]
pub struct HideApi {
    message: Option<String>,
    image: Option<CarrierSource>,
    output: Option<PathBuf>,
    keys: Option<KeySource>,
    options: SequenceOptions,
    cancel: CancellationToken,
}

impl HideApi {
    pub fn with_options(mut self, options: SequenceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn use_message<S: AsRef<str>>(mut self, message: Option<S>) -> Self {
        self.message = message.map(|s| s.as_ref().to_string());
        self
    }

    /// Carrier that is already in memory
    pub fn with_image(mut self, image: CarrierImage) -> Self {
        self.image = Some(CarrierSource::Image(image));
        self
    }

    /// PNG file that is read on execution
    pub fn with_image_file<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(CarrierSource::File(image.as_ref().to_path_buf()));
        self
    }

    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn with_keys(mut self, keys: KeyMaterial) -> Self {
        self.keys = Some(KeySource::Keys(keys));
        self
    }

    /// Derive the keys from a password and the salt that was generated with it
    pub fn with_password(mut self, password: &str, salt: Salt) -> Self {
        self.keys = Some(KeySource::Password {
            password: password.to_string(),
            salt,
        });
        self
    }

    /// Read the keys from a key file, sealed key files need their password
    pub fn with_key_file<A: AsRef<Path>>(mut self, key_file: A, password: Option<&str>) -> Self {
        self.keys = Some(KeySource::key_file(key_file.as_ref(), password));
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Hide the message and write the result to the output file
    pub fn execute(self) -> Result<()> {
        let Some(output) = self.output.clone() else {
            return Err(PixelveilError::TargetNotSet);
        };

        self.execute_in_memory()?.save_png(output)
    }

    /// Hide the message and return the resulting image, an output file is ignored
    pub fn execute_in_memory(self) -> Result<CarrierImage> {
        let Some(message) = self.message else {
            return Err(PixelveilError::MissingMessage);
        };
        let Some(image) = self.image else {
            return Err(PixelveilError::CarrierNotSet);
        };
        let Some(keys) = self.keys else {
            return Err(PixelveilError::MissingKeys);
        };

        let image = image.load()?;
        let keys = keys.resolve()?;

        crate::hide_cancellable(&image, &message, &keys, &self.options, &self.cancel)
    }
}

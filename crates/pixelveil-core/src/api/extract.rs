use std::path::Path;

use pixelveil_crypto::{KeyMaterial, Salt};

use super::{CarrierSource, KeySource};
use crate::media::CarrierImage;
use crate::{CancellationToken, PixelveilError, Result, SequenceOptions};

pub fn prepare() -> ExtractApi {
    ExtractApi::default()
}

#[derive(Default, Debug)]
pub struct ExtractApi {
    image: Option<CarrierSource>,
    keys: Option<KeySource>,
    options: SequenceOptions,
    cancel: CancellationToken,
}

impl ExtractApi {
    /// Must be the options the message was hidden with
    pub fn with_options(mut self, options: SequenceOptions) -> Self {
        self.options = options;
        self
    }

    /// This is the image that contains the message
    pub fn with_image(mut self, image: CarrierImage) -> Self {
        self.image = Some(CarrierSource::Image(image));
        self
    }

    pub fn with_image_file<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(CarrierSource::File(image.as_ref().to_path_buf()));
        self
    }

    pub fn with_keys(mut self, keys: KeyMaterial) -> Self {
        self.keys = Some(KeySource::Keys(keys));
        self
    }

    pub fn with_password(mut self, password: &str, salt: Salt) -> Self {
        self.keys = Some(KeySource::Password {
            password: password.to_string(),
            salt,
        });
        self
    }

    pub fn with_key_file<A: AsRef<Path>>(mut self, key_file: A, password: Option<&str>) -> Self {
        self.keys = Some(KeySource::key_file(key_file.as_ref(), password));
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute the extraction and block until the message is recovered
    pub fn execute(self) -> Result<String> {
        let Some(image) = self.image else {
            return Err(PixelveilError::CarrierNotSet);
        };
        let Some(keys) = self.keys else {
            return Err(PixelveilError::MissingKeys);
        };

        let image = image.load()?;
        let keys = keys.resolve()?;

        crate::extract_cancellable(&image, &keys, &self.options, &self.cancel)
    }
}

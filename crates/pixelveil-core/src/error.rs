use thiserror::Error;

pub use pixelveil_crypto::CryptoError;

#[derive(Error, Debug)]
pub enum PixelveilError {
    /// Represents invalid key derivation parameters, for example too few PBKDF2 iterations
    #[error("Key derivation failed")]
    KeyDerivationFailure(#[source] CryptoError),

    /// Represents a wrong cipher key or a corrupted ciphertext, CBC cannot tell them apart
    #[error("Decryption failed")]
    DecryptionFailure(#[source] CryptoError),

    /// Represents a payload that does not fit into the carrier, nothing was written
    #[error(
        "Capacity Error: the payload needs {required_bits} bits but the carrier only offers {available_bits} bits"
    )]
    PayloadTooLarge {
        required_bits: usize,
        available_bits: usize,
    },

    /// Represents an extraction that found no delimited payload. This is also what a wrong pixel key looks like
    #[error("No hidden payload found")]
    NoHiddenPayload,

    /// Represents coordinates that do not revert to a checksum valid mnemonic under the given secret
    #[error("The secret does not match the coordinates")]
    InvalidSecret,

    #[error("Coordinate {0} is out of range, coordinates are below 2048")]
    InvalidCoordinate(u16),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] bip39::Error),

    /// Represents an invalid carrier image media. For example, a broken PNG file
    #[error("Image media is invalid")]
    ImageDecodeFailure,

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error")]
    ImageEncodingError,

    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Represents an unsupported carrier media. For example, a lossy JPEG file
    #[error("Media format is not supported")]
    UnsupportedMedia,

    /// Represents a sequence that was generated for other dimensions than the carrier has
    #[error("Sequence for {sequence_width}x{sequence_height} does not fit a {width}x{height} carrier")]
    SequenceMismatch {
        sequence_width: u32,
        sequence_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("No carrier media set")]
    CarrierNotSet,

    #[error("API Error: Missing message")]
    MissingMessage,

    #[error("API Error: Missing keys")]
    MissingKeys,

    #[error("No target file set")]
    TargetNotSet,

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Represents key file errors and everything else the crypto layer reports
    #[error(transparent)]
    Crypto(CryptoError),
}

impl From<CryptoError> for PixelveilError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::KeyDerivationError(_)
            | CryptoError::KeyDerivationParamError(_)
            | CryptoError::TooFewIterations { .. }
            | CryptoError::KeyExpansionError => PixelveilError::KeyDerivationFailure(e),
            CryptoError::DecryptionError | CryptoError::InvalidUtf8(_) => {
                PixelveilError::DecryptionFailure(e)
            }
            CryptoError::IoError(io) => PixelveilError::IoError(io),
            _ => PixelveilError::Crypto(e),
        }
    }
}

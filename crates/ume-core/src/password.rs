//! Random password generation and strength scoring.
//!
//! Passwords are drawn from a cryptographically secure generator. The
//! generator guarantees one character of every enabled class whenever the
//! requested length leaves room for it.

use crate::error::ViewError;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use chrono::{DateTime, Utc};
use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_-+=<>?/";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 24;
pub const DEFAULT_LENGTH: usize = 12;

/// Which character classes to draw from, and how many characters.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn with_length(length: usize) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Check that the length is one a user could pick in the app.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::PasswordLength`] when the length is outside
    /// [`MIN_LENGTH`]..=[`MAX_LENGTH`].
    pub const fn validate(&self) -> Result<(), ViewError> {
        if self.length < MIN_LENGTH || self.length > MAX_LENGTH {
            return Err(ViewError::PasswordLength {
                length: self.length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }
        Ok(())
    }

    /// Enabled classes in front-loading order. Lowercase alone when none are
    /// enabled.
    fn classes(&self) -> Vec<&'static str> {
        let classes: Vec<&'static str> = [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(enabled, chars)| enabled.then_some(chars))
        .collect();

        if classes.is_empty() {
            vec![LOWERCASE]
        } else {
            classes
        }
    }
}

/// Generate a password from the operating system's secure generator.
#[must_use]
pub fn generate(policy: &PasswordPolicy) -> String {
    generate_with(policy, &mut OsRng)
}

/// Generate a password from the supplied secure generator.
pub fn generate_with<R: Rng + CryptoRng + ?Sized>(policy: &PasswordPolicy, rng: &mut R) -> String {
    let classes = policy.classes();
    let pool: Vec<char> = classes.iter().flat_map(|class| class.chars()).collect();

    let mut chars: Vec<char> = Vec::with_capacity(policy.length);
    for class in classes.iter().take(policy.length) {
        let class: Vec<char> = class.chars().collect();
        chars.push(class[rng.gen_range(0..class.len())]);
    }
    while chars.len() < policy.length {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }
    chars.shuffle(rng);
    chars.into_iter().collect()
}

/// Coarse strength band shown next to a password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl Strength {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        }
    }

    const fn from_score(score: u8) -> Self {
        match score {
            8.. => Self::VeryStrong,
            6 | 7 => Self::Strong,
            4 | 5 => Self::Medium,
            _ => Self::Weak,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw score: 1-4 points for length plus one per character class present.
#[must_use]
pub fn strength_score(password: &str) -> u8 {
    let length_points = match password.chars().count() {
        16.. => 4,
        12..=15 => 3,
        8..=11 => 2,
        _ => 1,
    };
    let classes = [
        password.chars().any(char::is_uppercase),
        password.chars().any(char::is_lowercase),
        password.chars().any(char::is_numeric),
        password.chars().any(|c| !c.is_alphanumeric()),
    ];
    length_points + classes.into_iter().map(u8::from).sum::<u8>()
}

#[must_use]
pub fn evaluate_strength(password: &str) -> Strength {
    Strength::from_score(strength_score(password))
}

const SALT_LEN: usize = 16;

/// Stored form of an account password: a random salt and the SHA-256 of
/// salt then password, both lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub salt: String,
    pub digest: String,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Digest `password` under a fresh salt from the operating system.
    #[must_use]
    pub fn new(password: &str, updated_at: DateTime<Utc>) -> Self {
        Self::new_with(password, updated_at, &mut OsRng)
    }

    #[must_use]
    pub fn new_with<R: RngCore + CryptoRng + ?Sized>(
        password: &str,
        updated_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        let salt = to_hex(&salt);
        Self {
            digest: salted_digest(&salt, password),
            salt,
            updated_at,
        }
    }

    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        salted_digest(&self.salt, password) == self.digest
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    use fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

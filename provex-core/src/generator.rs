use async_trait::async_trait;
use provex_model::Identity;
use rand::distr::Alphanumeric;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::GenerationError;
use crate::traits::IdentityGenerator;

const FIRST_NAMES: &[&str] = &[
    "alex", "casey", "devon", "elliot", "harper", "jordan", "morgan", "quinn", "reese", "riley",
    "rowan", "sage", "skyler", "taylor",
];

const LAST_NAMES: &[&str] = &[
    "anderson", "bennett", "carter", "dawson", "ellis", "foster", "griffin", "hayes", "keller",
    "mercer", "norris", "parker", "sutton", "walsh",
];

const PASSWORD_LENGTH: usize = 16;

/// Default identity generator: random name pair from embedded pools, a
/// numeric suffix to spread the address space, and a random password.
///
/// The address space is what makes the read-then-decide uniqueness
/// check acceptable at low admission capacity; collisions are
/// negligible but still guarded twice (lookup plus unique index).
#[derive(Debug, Default)]
pub struct RandomIdentityGenerator;

impl RandomIdentityGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityGenerator for RandomIdentityGenerator {
    async fn generate(&self, domain: &str) -> Result<Identity, GenerationError> {
        let domain = domain.trim().trim_start_matches('@');
        if domain.is_empty() || !domain.contains('.') {
            return Err(GenerationError(format!("invalid domain: {domain:?}")));
        }

        let mut rng = rand::rng();
        let first = *FIRST_NAMES.choose(&mut rng).expect("pool is non-empty");
        let last = *LAST_NAMES.choose(&mut rng).expect("pool is non-empty");
        let suffix: u32 = rng.random_range(100..100_000);
        let password: String = (&mut rng)
            .sample_iter(Alphanumeric)
            .take(PASSWORD_LENGTH)
            .map(char::from)
            .collect();

        Ok(Identity {
            email: format!("{first}.{last}{suffix}@{domain}"),
            password,
            first_name: capitalize(first),
            last_name: capitalize(last),
            domain: domain.to_string(),
        })
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(head) => head.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_identity_for_domain() {
        let identity = RandomIdentityGenerator::new()
            .generate("example.dev")
            .await
            .unwrap();

        assert!(identity.email.ends_with("@example.dev"));
        assert_eq!(identity.password.len(), PASSWORD_LENGTH);
        assert_eq!(identity.domain, "example.dev");
        assert!(identity.first_name.chars().next().unwrap().is_uppercase());
    }

    #[tokio::test]
    async fn strips_leading_at_sign() {
        let identity = RandomIdentityGenerator::new()
            .generate("@example.dev")
            .await
            .unwrap();
        assert!(identity.email.ends_with("@example.dev"));
    }

    #[tokio::test]
    async fn rejects_bare_label() {
        assert!(RandomIdentityGenerator::new().generate("nodot").await.is_err());
        assert!(RandomIdentityGenerator::new().generate("  ").await.is_err());
    }
}

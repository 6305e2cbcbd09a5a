//! Sources of random, plausible-looking text for sample documents
use fake::{
    Fake,
    faker::{
        internet::en::SafeEmail,
        job::en::Title,
        lorem::en::{Paragraph, Sentence},
        name::en::{FirstName, LastName},
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Something that can produce the text fields of sample tasks and users
pub trait TextSource {
    fn sentence(&mut self) -> String;
    fn paragraph(&mut self) -> String;
    fn first(&mut self) -> String;
    fn last(&mut self) -> String;
    fn email(&mut self) -> String;
    fn profession(&mut self) -> String;
}

/// A [TextSource] backed by the `fake` crate
pub struct FakeText<R: Rng> {
    rng: R,
}

impl FakeText<StdRng> {
    /// Create a text source seeded from the operating system's entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a text source that always produces the same text for the same seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FakeText<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TextSource for FakeText<R> {
    fn sentence(&mut self) -> String {
        Sentence(12..19).fake_with_rng(&mut self.rng)
    }

    fn paragraph(&mut self) -> String {
        Paragraph(3..8).fake_with_rng(&mut self.rng)
    }

    fn first(&mut self) -> String {
        FirstName().fake_with_rng(&mut self.rng)
    }

    fn last(&mut self) -> String {
        LastName().fake_with_rng(&mut self.rng)
    }

    fn email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    fn profession(&mut self) -> String {
        Title().fake_with_rng(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_text_is_not_empty() {
        let mut text = FakeText::seeded(7);
        for _ in 0..50 {
            assert!(!text.sentence().is_empty());
            assert!(!text.paragraph().is_empty());
            assert!(!text.first().is_empty());
            assert!(!text.last().is_empty());
            assert!(text.email().contains('@'));
            assert!(!text.profession().is_empty());
        }
    }

    #[test]
    fn same_seed_same_text() {
        let (mut a, mut b) = (FakeText::seeded(42), FakeText::seeded(42));
        assert_eq!(a.sentence(), b.sentence());
        assert_eq!(a.email(), b.email());
    }
}

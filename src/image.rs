use std::fs;
use std::path::Path;

use crate::error::ImageError;
use crate::memory::{Memory, MEMORY_SIZE};
use crate::runtime::ORIGIN;

/// Program words, placed in memory starting at [`ORIGIN`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    words: Vec<u16>,
}

impl Image {
    /// Words between the origin and the end of memory.
    pub const CAPACITY: usize = MEMORY_SIZE - ORIGIN as usize;

    pub fn from_words(words: Vec<u16>) -> Result<Self, ImageError> {
        if words.len() > Self::CAPACITY {
            return Err(ImageError::TooLarge {
                words: words.len(),
                capacity: Self::CAPACITY,
            });
        }
        Ok(Self { words })
    }

    /// Each word is stored as two bytes, low byte first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() % 2 != 0 {
            return Err(ImageError::Unaligned { len: bytes.len() });
        }
        let words = bytes
            .chunks_exact(2)
            .map(|word| u16::from_le_bytes([word[0], word[1]]))
            .collect();
        Self::from_words(words)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Address of each word paired with the word.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        // Length is bounded by `CAPACITY`, so no address overflows
        self.words
            .iter()
            .enumerate()
            .map(|(i, word)| (ORIGIN + i as u16, *word))
    }

    pub fn load_into(&self, memory: &mut impl Memory) {
        for (addr, word) in self.iter() {
            memory.write(addr, word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Ram;

    #[test]
    fn little_endian_words() {
        let image = Image::from_bytes(&[0x02, 0xE0, 0x22, 0xF0]).unwrap();
        assert_eq!(image.words(), &[0xE002, 0xF022]);
    }

    #[test]
    fn rejects_odd_length() {
        let err = Image::from_bytes(&[0x25, 0xF0, 0x00]).unwrap_err();
        assert!(matches!(err, ImageError::Unaligned { len: 3 }));
    }

    #[test]
    fn rejects_oversized() {
        assert!(Image::from_words(vec![0; Image::CAPACITY]).is_ok());
        let err = Image::from_words(vec![0; Image::CAPACITY + 1]).unwrap_err();
        assert!(matches!(
            err,
            ImageError::TooLarge {
                words: 0xD001,
                capacity: 0xD000
            }
        ));
    }

    #[test]
    fn loads_at_origin() {
        let image = Image::from_words(vec![0x1111, 0x2222, 0x3333]).unwrap();
        let mut ram = Ram::new();
        image.load_into(&mut ram);
        assert_eq!(ram.read(ORIGIN - 1), 0);
        assert_eq!(ram.read(ORIGIN), 0x1111);
        assert_eq!(ram.read(ORIGIN + 2), 0x3333);
        assert_eq!(ram.read(ORIGIN + 3), 0);
    }

    #[test]
    fn full_image_reaches_last_address() {
        let mut words = vec![0; Image::CAPACITY];
        words[Image::CAPACITY - 1] = 0xabcd;
        let image = Image::from_words(words).unwrap();
        let mut ram = Ram::new();
        image.load_into(&mut ram);
        assert_eq!(ram.read(0xffff), 0xabcd);
    }
}

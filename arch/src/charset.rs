use bimap::BiMap;
use once_cell::sync::Lazy;

/// Byte that ends a string in ROM.
pub const TERMINATOR: u8 = 0xFF;

/// Bidirectional `code <-> glyph` table. A glyph may span several characters
/// (`\n`, `[player]`) and a code several bytes.
#[derive(Debug, Clone)]
pub struct Charset {
    map: BiMap<Vec<u8>, String>,
    longest_glyph: usize,
    longest_code: usize,
    lenient: bool,
}

impl Charset {
    /// `lenient` tables decode unmapped bytes as a space and only stop at the
    /// terminator; strict tables stop at the first unmapped byte.
    pub fn new<'a, I>(entries: I, lenient: bool) -> Self
    where
        I: IntoIterator<Item = (&'a [u8], &'a str)>,
    {
        let mut map = BiMap::new();
        for (code, glyph) in entries {
            map.insert(code.to_vec(), glyph.to_string());
        }
        let longest_glyph = map.right_values().map(|g| g.chars().count()).max().unwrap_or(1);
        let longest_code = map.left_values().map(|c| c.len()).max().unwrap_or(1);
        Charset {
            map,
            longest_glyph,
            longest_code,
            lenient,
        }
    }

    pub fn glyph(&self, code: &[u8]) -> Option<&str> {
        self.map.get_by_left(code).map(|g| g.as_str())
    }

    pub fn code(&self, glyph: &str) -> Option<&[u8]> {
        self.map.get_by_right(glyph).map(|c| c.as_slice())
    }

    /// Encodes `text` by greedy longest glyph match and appends the
    /// terminator. Fails with the first character no glyph starts with.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, char> {
        let chars: Vec<char> = text.chars().collect();
        let mut bytes = Vec::new();
        let mut idx = 0;
        'outer: while idx < chars.len() {
            let max = self.longest_glyph.min(chars.len() - idx);
            for len in (1..=max).rev() {
                let glyph: String = chars[idx..idx + len].iter().collect();
                if let Some(code) = self.code(&glyph) {
                    bytes.extend_from_slice(code);
                    idx += len;
                    continue 'outer;
                }
            }
            return Err(chars[idx]);
        }
        bytes.push(TERMINATOR);
        Ok(bytes)
    }

    /// Decodes from the start of `bytes`. Returns the text and the number of
    /// bytes consumed, terminator included when one was reached.
    pub fn decode(&self, bytes: &[u8]) -> (String, usize) {
        let mut text = String::new();
        let mut idx = 0;
        'outer: while idx < bytes.len() {
            if bytes[idx] == TERMINATOR {
                return (text, idx + 1);
            }
            let max = self.longest_code.min(bytes.len() - idx);
            for len in (1..=max).rev() {
                if let Some(glyph) = self.glyph(&bytes[idx..idx + len]) {
                    text.push_str(glyph);
                    idx += len;
                    continue 'outer;
                }
            }
            if !self.lenient {
                break;
            }
            text.push(' ');
            idx += 1;
        }
        (text, idx)
    }
}

macro_rules! table {
    ($($code:expr => $glyph:expr),* $(,)?) => {
        vec![$(({ let code: &[u8] = &$code; code }, $glyph)),*]
    };
}

pub static TEXT: Lazy<Charset> = Lazy::new(|| {
    let mut entries: Vec<(&[u8], &str)> = table! {
        [0x00] => " ",
        [0xAB] => "!",
        [0xAC] => "?",
        [0xAD] => ".",
        [0xAE] => "-",
        [0xAF] => "·",
        [0xB0] => "…",
        [0xB1] => "“",
        [0xB2] => "”",
        [0xB3] => "‘",
        [0xB4] => "'",
        [0xB5] => "♂",
        [0xB6] => "♀",
        [0xB8] => ",",
        [0xB9] => "×",
        [0xBA] => "/",
        [0xF0] => ":",
        [0xFA] => "\\l",
        [0xFB] => "\\p",
        [0xFE] => "\\n",
        [0xFD, 0x01] => "[player]",
        [0xFD, 0x02] => "[buffer1]",
        [0xFD, 0x03] => "[buffer2]",
        [0xFD, 0x04] => "[buffer3]",
        [0xFD, 0x06] => "[rival]",
        [0xFC, 0x01, 0x01] => "[white]",
        [0xFC, 0x01, 0x02] => "[black]",
    };
    entries.extend(DIGITS.iter().map(|(code, glyph)| (&code[..], *glyph)));
    entries.extend(UPPER.iter().map(|(code, glyph)| (&code[..], *glyph)));
    entries.extend(LOWER.iter().map(|(code, glyph)| (&code[..], *glyph)));
    Charset::new(entries, true)
});

static DIGITS: Lazy<Vec<([u8; 1], &'static str)>> = Lazy::new(|| run(0xA1, "0123456789"));
static UPPER: Lazy<Vec<([u8; 1], &'static str)>> =
    Lazy::new(|| run(0xBB, "ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
static LOWER: Lazy<Vec<([u8; 1], &'static str)>> =
    Lazy::new(|| run(0xD5, "abcdefghijklmnopqrstuvwxyz"));

/// Consecutive single-byte codes for the ASCII characters of `glyphs`.
fn run(first: u8, glyphs: &'static str) -> Vec<([u8; 1], &'static str)> {
    (0..glyphs.len())
        .map(|idx| ([first + idx as u8], &glyphs[idx..idx + 1]))
        .collect()
}

pub static BRAILLE: Lazy<Charset> = Lazy::new(|| {
    let entries: Vec<(&[u8], &str)> = table! {
        [0x00] => " ",
        [0x01] => "A",
        [0x05] => "B",
        [0x03] => "C",
        [0x0B] => "D",
        [0x09] => "E",
        [0x07] => "F",
        [0x0F] => "G",
        [0x0D] => "H",
        [0x06] => "I",
        [0x0E] => "J",
        [0x11] => "K",
        [0x15] => "L",
        [0x13] => "M",
        [0x1B] => "N",
        [0x19] => "O",
        [0x17] => "P",
        [0x1F] => "Q",
        [0x1D] => "R",
        [0x16] => "S",
        [0x1E] => "T",
        [0x31] => "U",
        [0x35] => "V",
        [0x2E] => "W",
        [0x33] => "X",
        [0x3B] => "Y",
        [0x39] => "Z",
        [0x04] => ",",
        [0x2C] => ".",
        [0xFE] => "\\n",
    };
    Charset::new(entries, false)
});

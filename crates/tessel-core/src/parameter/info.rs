//! Parameter descriptions published by nodes and containers.

use super::range::ParameterRange;

/// Maximum length in bytes of a parameter's short name.
pub const SHORT_NAME_LEN: usize = 24;

/// A fixed-capacity, UTF-8 parameter name.
///
/// Names longer than [`SHORT_NAME_LEN`] bytes are truncated at the last
/// character boundary that fits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortName {
    bytes: [u8; SHORT_NAME_LEN],
    len: u8,
}

impl ShortName {
    /// Creates a name, truncating if necessary.
    pub const fn new(name: &str) -> Self {
        let src = name.as_bytes();
        let mut len = if src.len() < SHORT_NAME_LEN {
            src.len()
        } else {
            SHORT_NAME_LEN
        };
        // back off to a char boundary: continuation bytes are 0b10xx_xxxx
        while len > 0 && len < src.len() && (src[len] & 0xC0) == 0x80 {
            len -= 1;
        }
        let mut bytes = [0u8; SHORT_NAME_LEN];
        let mut i = 0;
        while i < len {
            bytes[i] = src[i];
            i += 1;
        }
        Self {
            bytes,
            len: len as u8,
        }
    }

    /// The name.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..usize::from(self.len)]).unwrap_or_default()
    }

    /// The name padded with NULs to [`SHORT_NAME_LEN`] bytes.
    pub fn as_padded_bytes(&self) -> &[u8; SHORT_NAME_LEN] {
        &self.bytes
    }
}

impl core::fmt::Debug for ShortName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.as_str(), f)
    }
}

impl core::fmt::Display for ShortName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ShortName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ShortName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ShortName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

/// One exposed parameter: index, name, range and default.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterInfo {
    /// Index the parameter is set by.
    pub index: usize,
    /// Short display name.
    pub name: ShortName,
    /// Value domain.
    pub range: ParameterRange,
    /// Value after construction.
    pub default: f64,
}

impl ParameterInfo {
    /// A unit-range parameter defaulting to zero.
    pub const fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            name: ShortName::new(name),
            range: ParameterRange::unit(),
            default: 0.0,
        }
    }

    /// Returns a copy with a value domain.
    pub const fn with_range(mut self, range: ParameterRange) -> Self {
        self.range = range;
        self
    }

    /// Returns a copy with a default value.
    pub const fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }

    /// Returns a copy at a different index.
    pub const fn at_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Gain in decibels, `-100..=0`, 0.1 dB steps, skewed towards 0 dB.
    pub fn gain_db(index: usize, name: &str) -> Self {
        Self::new(index, name).with_range(
            ParameterRange::new(-100.0, 0.0)
                .with_interval(0.1)
                .with_centre_skew(-6.0),
        )
    }

    /// Time in milliseconds, `0..=1000`, skewed towards 100 ms.
    pub fn time_ms(index: usize, name: &str) -> Self {
        Self::new(index, name)
            .with_range(ParameterRange::new(0.0, 1000.0).with_centre_skew(100.0))
    }

    /// An on/off switch.
    pub fn toggle(index: usize, name: &str) -> Self {
        Self::new(index, name).with_range(ParameterRange::unit().with_interval(1.0))
    }
}

/// Ordered collection of [`ParameterInfo`]s, filled by
/// `describe_parameters`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    items: Vec<ParameterInfo>,
}

impl ParameterList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn add(&mut self, info: ParameterInfo) {
        self.items.push(info);
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no parameters were described.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parameter with `index`, if described.
    pub fn get(&self, index: usize) -> Option<&ParameterInfo> {
        self.items.iter().find(|p| p.index == index)
    }

    /// Parameter called `name`, if described.
    pub fn find(&self, name: &str) -> Option<&ParameterInfo> {
        self.items.iter().find(|p| p.name.as_str() == name)
    }

    /// Iterates in description order.
    pub fn iter(&self) -> core::slice::Iter<'_, ParameterInfo> {
        self.items.iter()
    }

    /// All parameters as a slice.
    pub fn as_slice(&self) -> &[ParameterInfo] {
        &self.items
    }
}

impl From<Vec<ParameterInfo>> for ParameterList {
    fn from(items: Vec<ParameterInfo>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a ParameterInfo;
    type IntoIter = core::slice::Iter<'a, ParameterInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

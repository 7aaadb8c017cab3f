//! Channel descriptions
//!
//! Each channel of an [`Image`](super::Image) has a kind (what the samples
//! mean) and a trait (how operators must treat it).

/// What a channel's samples represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Gray level
    Gray,
    /// Red component
    Red,
    /// Green component
    Green,
    /// Blue component
    Blue,
    /// Opacity (0 = transparent, `QUANTUM_RANGE` = opaque)
    Alpha,
}

/// How an operator treats a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelTrait {
    /// Channel is inactive; operators pass it through untouched
    Undefined,
    /// Channel is copied verbatim from the input
    Copy,
    /// Channel is updated by the operator
    #[default]
    Update,
    /// Channel is updated, weighting neighbors by their alpha
    Blend,
}

impl ChannelTrait {
    /// True if an operator should compute new values for this channel
    #[inline]
    pub fn is_updated(self) -> bool {
        matches!(self, ChannelTrait::Update | ChannelTrait::Blend)
    }
}

/// A channel's kind together with its trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelInfo {
    /// Sample meaning
    pub kind: ChannelKind,
    /// Operator policy
    pub traits: ChannelTrait,
}

/// Standard channel arrangements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single gray channel
    #[default]
    Gray,
    /// Gray plus alpha
    GrayAlpha,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue, alpha
    Rgba,
}

impl ChannelLayout {
    /// Number of channels in the layout
    pub fn channel_count(self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::GrayAlpha => 2,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    /// Channel descriptions for the layout
    ///
    /// When the layout has alpha, the color channels get
    /// [`ChannelTrait::Blend`] and alpha itself gets [`ChannelTrait::Update`].
    pub fn channels(self) -> Vec<ChannelInfo> {
        let kinds: &[ChannelKind] = match self {
            ChannelLayout::Gray => &[ChannelKind::Gray],
            ChannelLayout::GrayAlpha => &[ChannelKind::Gray, ChannelKind::Alpha],
            ChannelLayout::Rgb => &[ChannelKind::Red, ChannelKind::Green, ChannelKind::Blue],
            ChannelLayout::Rgba => &[
                ChannelKind::Red,
                ChannelKind::Green,
                ChannelKind::Blue,
                ChannelKind::Alpha,
            ],
        };
        let has_alpha = kinds.contains(&ChannelKind::Alpha);
        kinds
            .iter()
            .map(|&kind| ChannelInfo {
                kind,
                traits: if has_alpha && kind != ChannelKind::Alpha {
                    ChannelTrait::Blend
                } else {
                    ChannelTrait::Update
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_traits() {
        let rgba = ChannelLayout::Rgba.channels();
        assert_eq!(rgba.len(), 4);
        assert_eq!(rgba[0].traits, ChannelTrait::Blend);
        assert_eq!(rgba[3].kind, ChannelKind::Alpha);
        assert_eq!(rgba[3].traits, ChannelTrait::Update);

        let gray = ChannelLayout::Gray.channels();
        assert_eq!(gray[0].traits, ChannelTrait::Update);
    }

    #[test]
    fn test_is_updated() {
        assert!(ChannelTrait::Update.is_updated());
        assert!(ChannelTrait::Blend.is_updated());
        assert!(!ChannelTrait::Copy.is_updated());
        assert!(!ChannelTrait::Undefined.is_updated());
    }
}

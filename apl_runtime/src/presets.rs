// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canned model structures for `LoadModel`.
//!
//! Presets are plain data: an embedding layer, `blocks` transformer blocks and
//! a linear head, sized from the table below.

use apl_parser::Dim;

use crate::registry::LayerRecord;

/// A named model structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub vocab_size: u64,
    pub hidden_size: u64,
    pub blocks: usize,
}

/// Known presets, in the order they are suggested to the user.
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "tinyllama",
        description: "TinyLlama (1.1B)",
        vocab_size: 32_000,
        hidden_size: 2048,
        blocks: 22,
    },
    Preset {
        name: "mistral",
        description: "Mistral (7B)",
        vocab_size: 32_000,
        hidden_size: 4096,
        blocks: 32,
    },
];

/// Looks up a preset by name, ignoring ASCII case.
#[must_use]
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Suggestion shown when a preset name is not recognized.
#[must_use]
pub fn preset_hint() -> String {
    let names: Vec<String> = PRESETS.iter().map(|p| format!("'{}'", p.name)).collect();
    format!("Try {}.", names.join(" or "))
}

impl Preset {
    /// Expands the preset into its ordered layer records.
    #[must_use]
    pub fn layers(&self) -> Vec<LayerRecord> {
        let mut layers = Vec::with_capacity(self.layer_count());
        layers.push(LayerRecord::new(
            "Embed",
            "Embedding",
            vec![Dim::Size(self.vocab_size), Dim::Size(self.hidden_size)],
        ));
        layers.extend((0..self.blocks).map(|i| {
            LayerRecord::new(
                format!("Block{i}"),
                "TransformerBlock",
                vec![Dim::Size(self.hidden_size)],
            )
        }));
        layers.push(LayerRecord::new(
            "Head",
            "Linear",
            vec![Dim::Size(self.hidden_size), Dim::Size(self.vocab_size)],
        ));
        layers
    }

    /// Number of records [`Preset::layers`] produces.
    #[must_use]
    pub const fn layer_count(&self) -> usize {
        self.blocks + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_preset_case_insensitive() {
        assert_eq!(find_preset("TinyLlama").map(|p| p.name), Some("tinyllama"));
        assert_eq!(find_preset("MISTRAL").map(|p| p.blocks), Some(32));
        assert!(find_preset("gpt9").is_none());
        assert!(find_preset("").is_none());
    }

    #[test]
    fn test_tinyllama_layers() {
        let preset = find_preset("tinyllama").unwrap();
        let layers = preset.layers();
        assert_eq!(layers.len(), 24);
        assert_eq!(preset.layer_count(), 24);
        assert_eq!(layers[0].name, "Embed");
        assert_eq!(layers[0].kind, "Embedding");
        assert_eq!(layers[0].shape_label(), "32000x2048");
        assert_eq!(layers[1].name, "Block0");
        assert_eq!(layers[22].name, "Block21");
        assert_eq!(layers[22].kind, "TransformerBlock");
        assert_eq!(layers[23].name, "Head");
        assert_eq!(layers[23].shape_label(), "2048x32000");
    }

    #[test]
    fn test_mistral_layers() {
        let layers = find_preset("mistral").unwrap().layers();
        assert_eq!(layers.len(), 34);
        assert_eq!(layers[1].shape, vec![Dim::Size(4096)]);
    }

    #[test]
    fn test_preset_hint_lists_table() {
        assert_eq!(preset_hint(), "Try 'tinyllama' or 'mistral'.");
    }
}

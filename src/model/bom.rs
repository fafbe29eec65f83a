//! Bill of materials: which parts each product consumes.
//!
//! Every product shares the base kit (parts `0..base_kit_size`) and adds its own
//! variant parts. The catalog is loaded once at startup and shared read-only.
//!
//! The file format is one line per product, each line the `;`-joined **1-based**
//! ids of that product's variant parts:
//!
//! ```text
//! 44;45;46
//! 47;48
//! ```

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BomError {
    #[error("Failed to read bill of materials '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: '{value}' is not a part id")]
    InvalidPartId { line: usize, value: String },

    #[error("Line {line}: part {part} is outside 1..={num_parts}")]
    PartOutOfRange {
        line: usize,
        part: usize,
        num_parts: usize,
    },

    #[error("Base kit of {base_kit_size} parts does not fit in {num_parts} parts")]
    BaseKitTooLarge {
        base_kit_size: usize,
        num_parts: usize,
    },

    #[error("Line {line}: part {part} is already in the base kit")]
    PartInBaseKit { line: usize, part: usize },

    #[error("Line {line}: part {part} is listed twice")]
    DuplicatePart { line: usize, part: usize },

    #[error("Bill of materials lists no products")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillOfMaterials {
    base_kit_size: usize,
    /// 0-based variant part ids per product.
    variants: Vec<Vec<usize>>,
    num_parts: usize,
}

impl BillOfMaterials {
    /// Build from 0-based variant lists.
    ///
    /// Each part is consumed at most once per unit, so a variant list may neither
    /// repeat a part nor name one from the base kit.
    pub fn new(
        base_kit_size: usize,
        variants: Vec<Vec<usize>>,
        num_parts: usize,
    ) -> Result<Self, BomError> {
        if base_kit_size > num_parts {
            return Err(BomError::BaseKitTooLarge {
                base_kit_size,
                num_parts,
            });
        }
        if variants.is_empty() {
            return Err(BomError::Empty);
        }
        for (idx, parts) in variants.iter().enumerate() {
            if let Some(&part) = parts.iter().find(|&&p| p >= num_parts) {
                return Err(BomError::PartOutOfRange {
                    line: idx + 1,
                    part: part + 1,
                    num_parts,
                });
            }
            if let Some(&part) = parts.iter().find(|&&p| p < base_kit_size) {
                return Err(BomError::PartInBaseKit {
                    line: idx + 1,
                    part: part + 1,
                });
            }
            let mut seen = HashSet::new();
            if let Some(&part) = parts.iter().find(|&&p| !seen.insert(p)) {
                return Err(BomError::DuplicatePart {
                    line: idx + 1,
                    part: part + 1,
                });
            }
        }
        Ok(Self {
            base_kit_size,
            variants,
            num_parts,
        })
    }

    /// Parse the products file format. Blank lines are ignored.
    pub fn parse(text: &str, base_kit_size: usize, num_parts: usize) -> Result<Self, BomError> {
        let mut variants = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = Vec::new();
            for item in line.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                let id: usize = item.parse().map_err(|_| BomError::InvalidPartId {
                    line: idx + 1,
                    value: item.to_string(),
                })?;
                if id == 0 || id > num_parts {
                    return Err(BomError::PartOutOfRange {
                        line: idx + 1,
                        part: id,
                        num_parts,
                    });
                }
                parts.push(id - 1);
            }
            variants.push(parts);
        }
        Self::new(base_kit_size, variants, num_parts)
    }

    pub fn load(
        path: impl AsRef<Path>,
        base_kit_size: usize,
        num_parts: usize,
    ) -> Result<Self, BomError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| BomError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, base_kit_size, num_parts)
    }

    /// Deterministic catalog: the parts after the base kit are split evenly between
    /// products, in order. Leftover parts belong to no product.
    pub fn generated(
        num_products: usize,
        base_kit_size: usize,
        num_parts: usize,
    ) -> Result<Self, BomError> {
        let free = num_parts.saturating_sub(base_kit_size);
        let per_product = if num_products == 0 { 0 } else { free / num_products };
        let variants = (0..num_products)
            .map(|p| {
                let start = base_kit_size + p * per_product;
                (start..start + per_product).collect()
            })
            .collect();
        Self::new(base_kit_size, variants, num_parts)
    }

    /// Every part `product` needs, base kit first, then its variants.
    pub fn requirements(&self, product: usize) -> Option<Vec<usize>> {
        let variants = self.variants.get(product)?;
        Some((0..self.base_kit_size).chain(variants.iter().copied()).collect())
    }

    pub fn product_count(&self) -> usize {
        self.variants.len()
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn base_kit_size(&self) -> usize {
        self.base_kit_size
    }
}

//! # Catalog
//!
//! The list of item definitions every ledger entry and inventory count
//! points at.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add(NewCatalogItem)     validate → name unique? → assign id → push    │
//! │  update(CatalogItem)     validate → exists? → name unique? → replace   │
//! │  remove(id, &Shift)      exists? → referenced by shift? → drop         │
//! │  reset_to_defaults()     replace everything with the seed list         │
//! │                                                                         │
//! │  Names compare trimmed and case-insensitive:                           │
//! │    "Pandesal (5)" collides with "  PANDESAL (5)"                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Item order is insertion order and is what the inventory sheet shows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CatalogItem, Category, NewCatalogItem, Shift};
use crate::validation::{validate_item_id, validate_item_name, validate_price_cents, validate_unit};

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Default for Catalog {
    /// A catalog holding the seed list.
    fn default() -> Self {
        Catalog {
            items: default_catalog(),
        }
    }
}

impl Catalog {
    /// Wraps items loaded from storage. No validation: stored items were
    /// validated when they were written.
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        Catalog { items }
    }

    pub fn empty() -> Self {
        Catalog { items: Vec::new() }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<CatalogItem> {
        self.items
    }

    /// Adds a new item and returns the stored copy.
    ///
    /// ## Rules
    /// - Name trimmed, non-empty, unique ignoring case
    /// - Unit trimmed and non-empty
    /// - Cost and price >= 0
    /// - A supplied id must be free; otherwise a UUID v4 is assigned
    pub fn add(&mut self, input: NewCatalogItem) -> CoreResult<CatalogItem> {
        let name = validate_item_name(&input.name)?;
        let unit = validate_unit(&input.unit)?;
        validate_price_cents("cost_price", input.cost_cents)?;
        validate_price_cents("selling_price", input.price_cents)?;

        if self.name_taken(&name, None) {
            return Err(CoreError::DuplicateName(name));
        }

        let id = match input.id {
            Some(id) => {
                validate_item_id(&id)?;
                if self.contains(&id) {
                    return Err(ValidationError::Duplicate {
                        field: "id".to_string(),
                        value: id,
                    }
                    .into());
                }
                id
            }
            None => Uuid::new_v4().to_string(),
        };

        let item = CatalogItem {
            id,
            name,
            category: input.category,
            unit,
            cost_cents: input.cost_cents,
            price_cents: input.price_cents,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Replaces an existing item in place, keeping its position.
    pub fn update(&mut self, item: CatalogItem) -> CoreResult<CatalogItem> {
        let name = validate_item_name(&item.name)?;
        let unit = validate_unit(&item.unit)?;
        validate_price_cents("cost_price", item.cost_cents)?;
        validate_price_cents("selling_price", item.price_cents)?;

        let position = self
            .items
            .iter()
            .position(|existing| existing.id == item.id)
            .ok_or_else(|| CoreError::UnknownItem(item.id.clone()))?;

        if self.name_taken(&name, Some(&item.id)) {
            return Err(CoreError::DuplicateName(name));
        }

        let updated = CatalogItem { name, unit, ..item };
        self.items[position] = updated.clone();
        Ok(updated)
    }

    /// Removes an item unless the current shift still references it.
    ///
    /// Only the given shift is checked; archived shifts keep their own
    /// copies of counts in their reports.
    pub fn remove(&mut self, id: &str, current: &Shift) -> CoreResult<CatalogItem> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| CoreError::UnknownItem(id.to_string()))?;

        if let Some(reason) = current.references_item(id) {
            return Err(CoreError::ItemInUse {
                item_id: id.to_string(),
                reason,
            });
        }

        Ok(self.items.remove(position))
    }

    /// Replaces the whole catalog with the seed list. Shift data is untouched.
    pub fn reset_to_defaults(&mut self) {
        self.items = default_catalog();
    }

    fn name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        let wanted = name.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| Some(item.id.as_str()) != except_id)
            .any(|item| item.name.trim().to_lowercase() == wanted)
    }
}

// =============================================================================
// Seed List
// =============================================================================

/// (id, name, category, unit, cost cents, price cents)
const SEED: &[(&str, &str, Category, &str, i64, i64)] = &[
    ("1", "CHOCO BREAD", Category::Bread, "pcs", 200, 500),
    ("2", "HALF MOON", Category::Bread, "pcs", 200, 500),
    ("3", "SQUASH", Category::Bread, "pcs", 200, 500),
    ("4", "CHEESEDESAL", Category::Bread, "pcs", 200, 500),
    ("5", "CHEESEROLL", Category::Bread, "pcs", 200, 500),
    ("6", "CHOCOLANAY", Category::Bread, "pcs", 200, 500),
    ("7", "EGGDESAL", Category::Bread, "pcs", 200, 500),
    ("8", "ENSAYMADA MONGO", Category::Bread, "pcs", 300, 800),
    ("9", "LOAFBREAD (55)", Category::Bread, "loaf", 2500, 5500),
    ("10", "LOAFBREAD (45)", Category::Bread, "loaf", 2000, 4500),
    ("11", "LOAFBREAD (35)", Category::Bread, "loaf", 1500, 3500),
    ("12", "LOAFBREAD (20)", Category::Bread, "loaf", 800, 2000),
    ("13", "MONAY", Category::Bread, "pcs", 200, 500),
    ("14", "MONGO BREAD", Category::Bread, "pcs", 200, 500),
    ("15", "MUSHROOM", Category::Bread, "pcs", 200, 500),
    ("16", "PANDESAL (2)", Category::Bread, "pcs", 80, 200),
    ("17", "PANDESAL (5)", Category::Bread, "pcs", 200, 500),
    ("18", "PANDESAL (25)", Category::Bread, "pcs", 1000, 2500),
    ("19", "REBON", Category::Bread, "pcs", 200, 500),
    ("20", "SPANISH", Category::Bread, "pcs", 200, 500),
    ("21", "STAR BREAD", Category::Bread, "pcs", 200, 500),
    ("22", "SWEET DESAL", Category::Bread, "pcs", 200, 500),
    ("23", "UBE CHEESEROLL", Category::Bread, "pcs", 300, 800),
    ("24", "COCO BREAD", Category::Bread, "pcs", 200, 500),
    ("25", "Coca Cola (Kasalo)", Category::Beverage, "btl", 1500, 2500),
    ("26", "Coca Cola (1L)", Category::Beverage, "btl", 2500, 4000),
    ("27", "Coca Cola (1.5L)", Category::Beverage, "btl", 4500, 7000),
    ("28", "Sprite", Category::Beverage, "btl", 1200, 2000),
    ("29", "Royal", Category::Beverage, "btl", 1200, 2000),
    ("30", "Mountain Dew", Category::Beverage, "btl", 1200, 2000),
    ("31", "Bottled Water", Category::Beverage, "btl", 800, 1500),
];

/// The fixed seed list used on first run and by `reset_to_defaults`.
pub fn default_catalog() -> Vec<CatalogItem> {
    SEED.iter()
        .map(|&(id, name, category, unit, cost_cents, price_cents)| CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            category,
            unit: unit.to_string(),
            cost_cents,
            price_cents,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

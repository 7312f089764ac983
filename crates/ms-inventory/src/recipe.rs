//! Shaped crafting recipes.
//!
//! Patterns are stored trimmed to their bounding box, so a recipe matches
//! wherever it is placed in a grid. There is no rotation or mirroring.

use ms_item::ItemStack;
use tracing::debug;

use crate::error::RecipeError;

/// Largest crafting grid side.
pub const MAX_GRID: u8 = 3;

/// Durability requirement of an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthMatch {
    /// Any durability or variant.
    Any,
    Exact(i16),
}

/// One cell of a recipe pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingredient {
    /// The cell must be empty.
    Empty,
    Item { item: i16, health: HealthMatch },
}

impl Ingredient {
    pub fn exact(item: i16, health: i16) -> Self {
        Ingredient::Item {
            item,
            health: HealthMatch::Exact(health),
        }
    }

    pub fn any(item: i16) -> Self {
        Ingredient::Item {
            item,
            health: HealthMatch::Any,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Ingredient::Empty)
    }

    /// Whether a grid slot satisfies this cell. Counts are not compared.
    pub fn matches(&self, slot: &ItemStack) -> bool {
        match *self {
            Ingredient::Empty => slot.is_empty(),
            Ingredient::Item { item, health } => {
                !slot.is_empty()
                    && slot.item() == item
                    && match health {
                        HealthMatch::Any => true,
                        HealthMatch::Exact(h) => slot.health() == h,
                    }
            }
        }
    }
}

/// Minimal rectangle `(x, y, width, height)` holding every non-empty cell.
fn bounding_box<T>(cells: &[T], width: usize, height: usize, empty: impl Fn(&T) -> bool) -> Option<(usize, usize, usize, usize)> {
    let (mut x0, mut y0) = (usize::MAX, usize::MAX);
    let (mut x1, mut y1) = (0, 0);
    for y in 0..height {
        for x in 0..width {
            if !empty(&cells[y * width + x]) {
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
            }
        }
    }
    if x0 == usize::MAX {
        return None;
    }
    Some((x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// A validated shaped recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    width: u8,
    height: u8,
    pattern: Vec<Ingredient>,
    output: ItemStack,
}

impl Recipe {
    /// Validate a `width` x `height` pattern (row-major) and trim it.
    pub fn new(width: u8, height: u8, inputs: Vec<Ingredient>, output: ItemStack) -> Result<Self, RecipeError> {
        if width == 0 || height == 0 || width > MAX_GRID || height > MAX_GRID {
            return Err(RecipeError::BadDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if inputs.len() != expected {
            return Err(RecipeError::ShapeMismatch {
                width,
                height,
                expected,
                got: inputs.len(),
            });
        }
        if output.is_empty() {
            return Err(RecipeError::EmptyOutput);
        }
        let (x0, y0, w, h) = bounding_box(&inputs, width as usize, height as usize, Ingredient::is_empty)
            .ok_or(RecipeError::EmptyPattern)?;
        let pattern = (y0..y0 + h)
            .flat_map(|y| (x0..x0 + w).map(move |x| (x, y)))
            .map(|(x, y)| inputs[y * width as usize + x])
            .collect();
        Ok(Self {
            width: w as u8,
            height: h as u8,
            pattern,
            output,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Trimmed pattern, row-major.
    pub fn pattern(&self) -> &[Ingredient] {
        &self.pattern
    }

    pub fn output(&self) -> &ItemStack {
        &self.output
    }

    /// Compare against the grid region starting at `(x0, y0)`.
    fn matches_at(&self, grid: &[ItemStack], grid_width: usize, x0: usize, y0: usize) -> bool {
        let w = self.width as usize;
        self.pattern.iter().enumerate().all(|(i, cell)| {
            let (x, y) = (x0 + i % w, y0 + i / w);
            cell.matches(&grid[y * grid_width + x])
        })
    }
}

/// Every registered recipe, in registration order.
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe from its raw parts.
    pub fn add_recipe(
        &mut self,
        width: u8,
        height: u8,
        inputs: Vec<Ingredient>,
        out_count: u8,
        out_type: i16,
        out_health: i16,
    ) -> Result<(), RecipeError> {
        let output = ItemStack::new(out_type, out_count, out_health);
        self.register(Recipe::new(width, height, inputs, output)?)
    }

    /// Register an already validated recipe. A second recipe with the same
    /// trimmed pattern is refused.
    pub fn register(&mut self, recipe: Recipe) -> Result<(), RecipeError> {
        if let Some(existing) = self
            .recipes
            .iter()
            .find(|r| r.width == recipe.width && r.height == recipe.height && r.pattern == recipe.pattern)
        {
            return Err(RecipeError::DuplicatePattern {
                existing: existing.output.item(),
            });
        }
        debug!(
            "Registered {}x{} recipe for {} x {}",
            recipe.width,
            recipe.height,
            recipe.output.count(),
            recipe.output.item()
        );
        self.recipes.push(recipe);
        Ok(())
    }

    /// First recipe matching a `width` x `height` grid (row-major).
    pub fn find(&self, grid: &[ItemStack], width: usize, height: usize) -> Option<&Recipe> {
        if grid.len() != width * height {
            return None;
        }
        let (x0, y0, w, h) = bounding_box(grid, width, height, ItemStack::is_empty)?;
        self.recipes
            .iter()
            .filter(|r| r.width as usize == w && r.height as usize == h)
            .find(|r| r.matches_at(grid, width, x0, y0))
    }

    /// Output for the grid, or an empty stack when nothing matches.
    pub fn do_craft(&self, grid: &[ItemStack], width: usize, height: usize) -> ItemStack {
        self.find(grid, width, height)
            .map(|r| r.output.clone())
            .unwrap_or_else(ItemStack::empty)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }
}

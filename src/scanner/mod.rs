//! Allergen matching over delivery menus.
//!
//! Matching is a case-insensitive, unanchored substring test of each
//! configured keyword against each ingredient name. The keyword list is fixed
//! configuration; it never comes from portal data.

use crate::portal::MenuItem;

/// A menu item flagged because at least one ingredient matched a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedMeal {
    pub meal_name: String,
    pub menu_meal_name: String,
    /// Every matching ingredient name, in menu order, one entry per
    /// ingredient.
    pub matched_ingredients: Vec<String>,
}

/// An alert-worthy delivery: its date plus the meals flagged on it.
#[derive(Debug, Clone)]
pub struct AllergenAlert {
    pub date: String,
    pub meals: Vec<FlaggedMeal>,
}

pub struct AllergenScanner {
    /// Lower-cased once at construction.
    keywords: Vec<String>,
}

impl AllergenScanner {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Derive a [`FlaggedMeal`] for every item with a matching ingredient.
    ///
    /// Output order preserves input order. The menu data itself is left
    /// untouched.
    pub fn scan(&self, meals: &[MenuItem]) -> Vec<FlaggedMeal> {
        meals
            .iter()
            .filter_map(|meal| {
                let matched: Vec<String> = meal
                    .ingredients
                    .iter()
                    .filter(|ingredient| self.matches(&ingredient.name))
                    .map(|ingredient| ingredient.name.clone())
                    .collect();

                if matched.is_empty() {
                    return None;
                }
                Some(FlaggedMeal {
                    meal_name: meal.meal_name.clone(),
                    menu_meal_name: meal.menu_meal_name.clone(),
                    matched_ingredients: matched,
                })
            })
            .collect()
    }

    fn matches(&self, ingredient_name: &str) -> bool {
        let lower = ingredient_name.to_lowercase();
        self.keywords.iter().any(|keyword| lower.contains(keyword))
    }
}

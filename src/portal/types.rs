//! Wire types for the portal's customer API.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/company/customer/order/{orderId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[serde(default)]
    pub deliveries: Vec<Delivery>,
}

/// One scheduled meal drop-off, as the portal reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub delivery_id: i64,
    /// Calendar date, `YYYY-MM-DD`, no time of day.
    pub date: String,
    #[serde(default)]
    pub hour_preference: String,
    #[serde(default)]
    pub diet_calories_id: i64,
    #[serde(default)]
    pub address_id: i64,
    #[serde(default)]
    pub pickup_point_id: Option<i64>,
    #[serde(default)]
    pub delivery_spot: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub delivery_meals: Vec<DeliveryMeal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMeal {
    pub delivery_meal_id: i64,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub diet_calories_meal_id: i64,
    #[serde(default)]
    pub added_by_user: bool,
    #[serde(default)]
    pub deleted: bool,
}

/// Response of `GET /api/company/general/menus/delivery/{deliveryId}/new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryMenu {
    #[serde(default)]
    pub menu_visible: String,
    #[serde(default)]
    pub show_nutrition: bool,
    #[serde(default)]
    pub show_ingredients: bool,
    #[serde(default, rename = "deliveryMenuMeal")]
    pub meals: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(default)]
    pub delivery_meal_id: i64,
    #[serde(default)]
    pub amount: i64,
    pub meal_name: String,
    pub menu_meal_name: String,
    #[serde(default)]
    pub menu_meal_id: i64,
    #[serde(default)]
    pub nutrition: Nutrition,
    /// Allergen tags the portal already supplies. Kept as-is; the scanner
    /// works on ingredient names, not on these.
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub switchable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrate: f64,
    #[serde(default)]
    pub dietary_fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub salt: f64,
    #[serde(default)]
    pub saturated_fatty_acids: f64,
    #[serde(default)]
    pub calories_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    /// Whether this is a primary, highlighted ingredient of the dish.
    #[serde(default)]
    pub major: bool,
}

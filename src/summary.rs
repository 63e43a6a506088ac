//! Order summary: chosen wine + dish and the estimated total.

use serde::Serialize;
use std::fmt;

use crate::error::{Result, SommelierError};
use crate::menu::{find_by_id, format_price, MenuItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub name: String,
    /// Price as shown on the menu.
    pub price: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub wine: OrderLine,
    pub food: OrderLine,
    pub total: f64,
}

impl OrderSummary {
    /// Wine by id, dish by id or exact name. A dish not on the menu keeps its
    /// name and counts as `0,00 €`. An unparsable price counts as zero.
    pub fn build(menu: &[MenuItem], wine_id: &str, food: &str) -> Result<Self> {
        let wine = find_by_id(menu, wine_id)
            .filter(|w| w.category.is_wine())
            .ok_or_else(|| SommelierError::UnknownWine(wine_id.to_string()))?;

        let dish = menu
            .iter()
            .find(|i| i.category.is_food() && (i.id == food || i.name == food));

        let wine_line = OrderLine {
            name: wine.name.clone(),
            price: wine.price.clone(),
            amount: wine.price_value().unwrap_or(0.0),
        };
        let food_line = match dish {
            Some(d) => OrderLine {
                name: d.name.clone(),
                price: d.price.clone(),
                amount: d.price_value().unwrap_or(0.0),
            },
            None => OrderLine {
                name: food.to_string(),
                price: format_price(0.0),
                amount: 0.0,
            },
        };

        Ok(Self {
            total: wine_line.amount + food_line.amount,
            wine: wine_line,
            food: food_line,
        })
    }

    /// Total rendered like the menu prices.
    pub fn total_label(&self) -> String {
        format_price(self.total)
    }
}

impl fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wine:   {} ({})", self.wine.name, self.wine.price)?;
        writeln!(f, "Food:   {} ({})", self.food.name, self.food.price)?;
        write!(f, "Total:  {}", self.total_label())
    }
}

use crate::organisms::Position;
use crate::world::TickClock;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Fraction of `max_quantity` a consumed source must regrow before animals
/// can see it again
pub const REOPEN_FRACTION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodType {
    Grass,
    Berries,
    Nuts,
    Meat,
    Fish,
    Insects,
}

/// A regenerating patch of food
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct FoodSource {
    pub food_type: FoodType,
    /// Energy provided per unit of quantity
    pub nutrition_value: f32,
    pub quantity: f32,
    pub max_quantity: f32,
    /// Quantity regrown per second
    pub regeneration_rate: f32,
    /// Seconds spent depleted
    pub regeneration_timer: f32,
    pub is_consumed: bool,
    pub can_regenerate: bool,
}

impl FoodSource {
    /// Remove up to `amount`, returning what was actually taken
    pub fn consume(&mut self, amount: f32) -> f32 {
        let taken = amount.max(0.0).min(self.quantity);
        self.quantity -= taken;
        if self.quantity <= 0.0 {
            self.quantity = 0.0;
            self.is_consumed = true;
        }
        taken
    }

    /// Quantity units needed to yield `energy`
    pub fn quantity_for_energy(&self, energy: f32) -> f32 {
        if self.nutrition_value > 0.0 {
            energy / self.nutrition_value
        } else {
            0.0
        }
    }

    pub fn regenerate(&mut self, dt: f32) {
        if !self.can_regenerate {
            return;
        }
        if self.is_consumed {
            self.regeneration_timer += dt;
        }
        self.quantity = (self.quantity + self.regeneration_rate * dt).min(self.max_quantity);
        if self.is_consumed && self.quantity >= self.max_quantity * REOPEN_FRACTION {
            self.is_consumed = false;
            self.regeneration_timer = 0.0;
        }
    }
}

/// Parameters for newly placed food sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodTemplate {
    pub food_type: FoodType,
    pub nutrition_value: f32,
    pub quantity: f32,
    pub regeneration_rate: f32,
}

impl Default for FoodTemplate {
    fn default() -> Self {
        Self {
            food_type: FoodType::Grass,
            nutrition_value: 25.0,
            quantity: 100.0,
            regeneration_rate: 10.0,
        }
    }
}

impl FoodTemplate {
    pub fn source(&self) -> FoodSource {
        FoodSource {
            food_type: self.food_type,
            nutrition_value: self.nutrition_value,
            quantity: self.quantity,
            max_quantity: self.quantity,
            regeneration_rate: self.regeneration_rate,
            regeneration_timer: 0.0,
            is_consumed: false,
            can_regenerate: true,
        }
    }
}

#[derive(Bundle, Debug, Clone)]
pub struct FoodBundle {
    pub position: Position,
    pub food: FoodSource,
}

/// Regrow every food source
pub fn regenerate_food(mut query: Query<&mut FoodSource>, clock: Res<TickClock>) {
    let dt = clock.delta_seconds;
    if dt <= 0.0 {
        return;
    }
    for mut food in query.iter_mut() {
        food.regenerate(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_clamps_and_flags() {
        let mut food = FoodTemplate::default().source();
        assert_eq!(food.consume(30.0), 30.0);
        assert_eq!(food.quantity, 70.0);
        assert!(!food.is_consumed);

        assert_eq!(food.consume(500.0), 70.0);
        assert_eq!(food.quantity, 0.0);
        assert!(food.is_consumed);
    }

    #[test]
    fn consumed_source_reopens_after_regrowth() {
        let mut food = FoodTemplate::default().source();
        food.consume(100.0);
        food.regenerate(0.5);
        assert!(food.is_consumed);
        assert!(food.regeneration_timer > 0.0);

        food.regenerate(0.5);
        assert!(!food.is_consumed);
        assert_eq!(food.regeneration_timer, 0.0);
        assert_eq!(food.quantity, 10.0);
    }

    #[test]
    fn regrowth_caps_at_max() {
        let mut food = FoodTemplate::default().source();
        food.consume(5.0);
        food.regenerate(100.0);
        assert_eq!(food.quantity, food.max_quantity);
    }

    #[test]
    fn nutrition_converts_energy_to_quantity() {
        let food = FoodTemplate::default().source();
        assert!((food.quantity_for_energy(50.0) - 2.0).abs() < 1e-6);
    }
}

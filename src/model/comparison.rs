/// A fixed reference object with its characteristic length in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonItem {
    pub name: &'static str,
    pub length_cm: f64,
}

const fn item(name: &'static str, length_cm: f64) -> ComparisonItem {
    ComparisonItem { name, length_cm }
}

/// Reference catalog, atomic to galactic. Declaration order breaks ranking ties.
pub const COMPARISON_ITEMS: &[ComparisonItem] = &[
    item("Human (average)", 170.0),
    item("Basketball", 24.0),
    item("Baseball", 7.3),
    item("Golf ball", 4.3),
    item("Ping pong ball", 4.0),
    item("Sugar cube", 1.3),
    item("Grain of rice", 0.7),
    item("Bacterium", 0.001),
    item("Virus", 0.00001),
    item("Atom", 0.0000001),
    item("Elephant", 300.0),
    item("Giraffe", 550.0),
    item("Blue whale", 3000.0),
    item("Brachiosaurus", 2500.0),
    item("Tyrannosaurus Rex", 1200.0),
    item("Great white shark", 600.0),
    item("Grizzly bear", 250.0),
    item("Lion", 250.0),
    item("Horse", 150.0),
    item("Dog (large)", 80.0),
    item("Cat", 30.0),
    item("Mouse", 10.0),
    item("Ant", 0.5),
    item("Ladybug", 0.8),
    item("Bee", 1.5),
    item("Butterfly", 3.0),
    item("Dragonfly", 7.0),
    item("Hummingbird", 10.0),
    item("Sparrow", 16.0),
    item("Eagle", 90.0),
    item("Ostrich", 220.0),
    item("Penny", 1.91),
    item("Dime", 1.77),
    item("Quarter", 2.43),
    item("Apple", 7.5),
    item("Orange", 8.0),
    item("Watermelon", 25.0),
    item("Pumpkin", 30.0),
    item("Soda can", 12.0),
    item("Wine bottle", 30.0),
    item("Champagne bottle", 33.0),
    item("Toilet paper roll", 12.0),
    item("Paperclip", 3.3),
    item("Pencil", 19.0),
    item("Smartphone", 15.0),
    item("Laptop", 35.0),
    item("Dinner plate", 27.0),
    item("Pizza (large)", 35.0),
    item("Car", 450.0),
    item("Bus", 1000.0),
    item("Train car", 2600.0),
    item("Airplane (747)", 7000.0),
    item("Statue of Liberty", 9300.0),
    item("Empire State Building", 38100.0),
    item("Mount Everest", 884000.0),
    item("Earth", 1275600000.0),
    item("Moon", 347600000.0),
    item("Sun", 1391000000000.0),
    item("Jupiter", 13982000000000.0),
    item("Saturn", 11738000000000.0),
    item("Milky Way (diameter)", 1e21),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lengths_are_positive() {
        assert_eq!(COMPARISON_ITEMS.len(), 61);
        assert!(COMPARISON_ITEMS.iter().all(|i| i.length_cm > 0.0));
    }
}

//! List command implementation

use console::Style;

use crate::error::Result;
use crate::registry::Registry;

/// Print the available components in installation order
pub fn run() -> Result<()> {
    let registry = Registry::builtin();
    println!("{}", Style::new().bold().apply_to("Available components:"));
    for component in registry.iter() {
        println!(
            "  {:<12} {}",
            Style::new().cyan().bold().apply_to(component.name),
            component.description
        );
    }
    Ok(())
}

use proposals_codec::registry::SchemaRegistry;

/// Check that the registry is usable.
///
/// Registration conflicts already abort before this runs, so what is left to
/// catch is names that are referenced but never registered.
pub fn execute(registry: &SchemaRegistry) -> Result<(), Box<dyn std::error::Error>> {
    println!("Checking type registry...");
    println!();
    println!("  Registered types: {}", registry.len());

    let unresolved = registry.unresolved();
    if unresolved.is_empty() {
        println!("  References: all resolved");
        println!();
        println!("All checks passed");
        Ok(())
    } else {
        for name in &unresolved {
            tracing::warn!(name = %name, "referenced type is not registered");
            println!("  Unresolved: {}", name);
        }
        println!();
        Err(format!("{} unresolved type reference(s)", unresolved.len()).into())
    }
}

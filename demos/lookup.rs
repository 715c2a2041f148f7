/// Look up a few addresses against the live provider and print them.
///
/// Usage:
///   cargo run --example lookup -- 8.8.8.8 example.com
///
///   With no arguments the location of this machine is shown.
use geolocator::GeoLocator;

fn main() -> Result<(), geolocator::Error> {
    let locator = GeoLocator::new()?;
    let targets: Vec<String> = std::env::args().skip(1).collect();

    if targets.is_empty() {
        let me = locator.get_location()?;
        println!("{me} ({}, {})", me.latitude, me.longitude);
        return Ok(());
    }

    for target in &targets {
        match locator.get_location_for(target) {
            Ok(loc) => println!("{target} -> {loc} [{}]", loc.time_zone),
            Err(err) => eprintln!("{target}: {err}"),
        }
    }
    Ok(())
}

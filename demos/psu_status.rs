use std::env;

use e1031_psu::{PlatformConfig, PowerSupply, Psu, PsuSlot};
use inquire::Select;
use strum::IntoEnumIterator;

// Print every reading of one PSU.
//
// Usage: psu_status [index] [sysfs root]
// Without an index, choose the PSU interactively. The root defaults to `/`.
fn main() {
    env_logger::init();

    let config = match env::args().nth(2) {
        Some(root) => PlatformConfig::with_root(root),
        None => PlatformConfig::default(),
    };

    let index = match env::args().nth(1) {
        Some(arg) => match arg.parse::<u8>() {
            Ok(index) => index,
            Err(e) => {
                eprintln!("Invalid PSU index {arg:?}: {e}");
                std::process::exit(1);
            }
        },
        None => {
            let names: Vec<&str> = PsuSlot::iter().map(|slot| slot.name()).collect();
            let choice = Select::new("Select a PSU:", names.clone())
                .prompt()
                .expect("No PSU selected");
            names
                .iter()
                .position(|name| *name == choice)
                .expect("Selected PSU not in list") as u8
        }
    };

    let psu = match Psu::with_config(index, &config) {
        Ok(psu) => psu,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    println!("{} (index {})", psu.get_name(), psu.index());
    println!("  present:        {}", psu.get_presence());
    println!("  status:         {}", psu.get_status());
    println!("  power good:     {}", psu.get_powergood_status());
    println!("  model:          {}", psu.get_model().unwrap_or_else(|| "N/A".into()));
    println!("  serial:         {}", psu.get_serial().unwrap_or_else(|| "N/A".into()));
    println!("  voltage:        {:.3} V", psu.read_voltage());
    println!(
        "  voltage limits: {:.3} V .. {:.3} V",
        psu.get_voltage_low_threshold(),
        psu.get_voltage_high_threshold()
    );
    println!("  current:        {:.3} A", psu.read_current());
    println!(
        "  power:          {:.3} W (max {:.1} W)",
        psu.read_power(),
        psu.get_maximum_supplied_power()
    );
    match psu.read_temperature() {
        Some(temp) => println!("  temperature:    {temp:.3} C"),
        None => println!("  temperature:    N/A"),
    }
    if let Some(max) = psu.get_temperature_high_threshold() {
        println!("  temp limit:     {max:.3} C");
    }
    println!("  status LED:     {}", psu.get_status_led());
    println!("  fans:           {}", psu.get_num_fans());
}

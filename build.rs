use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=20000000");

    // Host builds only carry the portable scheduling core and its tests
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Configure for ATmega1284P
    println!("cargo:rustc-link-arg=-mmcu=atmega1284p");
    println!("cargo:warning=Building for ATmega1284P at 20MHz");
}

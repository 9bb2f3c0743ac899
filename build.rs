fn main() {
    println!("cargo:rerun-if-changed=config/dehumidifier.json");

    // Host builds (tests, fuzzing) carry no ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

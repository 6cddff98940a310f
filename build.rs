fn main() {
    // ESP-IDF link arguments are only needed when cross-compiling for the
    // chip; host builds (simulation, tests) skip them.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}

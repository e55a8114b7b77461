fn main() {
    // ESP-IDF link-time environment is only needed for on-target builds.
    // Host builds compile with no default features and skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

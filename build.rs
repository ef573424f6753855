fn main() {
    // Only the ESP-IDF build needs the sysenv propagation; host test builds
    // compile without embuild.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

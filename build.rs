fn main() {
    // Forwards ESP-IDF environment to rustc when building for the device;
    // a no-op for host-target test builds.
    embuild::espidf::sysenv::output();
}

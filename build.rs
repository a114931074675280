fn main() {
    // No-op on host builds: without the ESP-IDF environment variables this
    // emits nothing, so tests against the simulation stubs need no toolchain
    // setup.
    embuild::espidf::sysenv::output();
}

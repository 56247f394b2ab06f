use fastpin::{ bind_calling_thread_to_fastest_core, thread_affinity, Thread };

fn main() {
    env_logger::init();

    log::info!("{} cores, fastest is {:?}", fastpin::count_cores(), fastpin::max_frequency_core());
    bind_calling_thread_to_fastest_core();

    match thread_affinity(Thread::Current) {
        Ok(mask) => log::info!("Main thread affinity: {:?}", mask),
        Err(err) => log::warn!("{}", err),
    }
}

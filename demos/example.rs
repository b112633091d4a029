#[cfg(target_os = "linux")]
pub fn main() -> sbsread::Result<()> {
    use std::time::Duration;

    let mut battery = sbsread::SmartBattery::open_default_address("/dev/i2c-1")?;
    loop {
        let battery_state = battery.fetch_state()?;
        println!("{battery_state:?}");
        std::thread::sleep(Duration::from_secs(5));
    }
}

#[cfg(not(target_os = "linux"))]
pub fn main() {
    eprintln!("this example reads the battery through Linux i2c-dev and only runs on Linux");
}

#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::{
    analog::adc::{Adc, AdcConfig, Attenuation},
    clock::CpuClock,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    time::{Instant, Rate},
    timer::timg::TimerGroup,
};
use log::{LevelFilter, info};
use perforator_core::{
    app::{PanelApp, PanelConfig, TickResult},
    input::keypad::KeypadConfig,
    menu::{DEFAULT_TEMPLATES, MenuTree, RenderGate},
    settings::CalibrationStore,
};
use perforator_hal_esp32s3::{
    input::keypad::AnalogKeypad,
    motion::stepper::{StepperConfig, StepperDriver},
    render::OledCanvas,
    sensor::hole::{HoleSensor, HoleSensorConfig},
    storage::flash_calibration::FlashCalibrationStore,
};
use sh1106::Sh1106;

const DISPLAY_I2C_KHZ: u32 = 400;
const MM_PER_HOLE: f64 = 2.5;
const SCREENSAVER_AFTER_MS: u64 = 120_000;
const STEP_PERIOD_US: u32 = 2_000;
const LOOP_PERIOD_US: u64 = 250;

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: perforator starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Wiring: SDA=GPIO8 SCL=GPIO9 KEYPAD=GPIO1 (ADC1) HOLE=GPIO4
    // STEP=GPIO5 DIR=GPIO6 EN=GPIO7
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(DISPLAY_I2C_KHZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO8)
    .with_scl(peripherals.GPIO9);

    let mut display = Sh1106::new(i2c, sh1106::Config::default());
    let mut display_fault_logged = false;
    if let Err(err) = display.initialize() {
        info!("display initialize failed: {:?}", err);
        display_fault_logged = true;
    } else {
        info!("display: initialize ok");
    }

    let mut adc_config = AdcConfig::new();
    let mut keypad_pin = adc_config.enable_pin(peripherals.GPIO1, Attenuation::_11dB);
    let mut adc = Adc::new(peripherals.ADC1, adc_config);
    let keypad = AnalogKeypad::new(
        move || nb::block!(adc.read_oneshot(&mut keypad_pin)).ok(),
        KeypadConfig::default(),
    );

    let hole_pin = Input::new(peripherals.GPIO4, InputConfig::default().with_pull(Pull::Up));
    let mut hole_sensor = HoleSensor::new(hole_pin, HoleSensorConfig::default()).unwrap();

    let mut stepper = StepperDriver::new(
        Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO6, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO7, Level::High, OutputConfig::default()),
        StepperConfig::default().with_step_period_us(STEP_PERIOD_US),
    )
    .unwrap();

    let mut calibration_store = match FlashCalibrationStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            info!("calibration: flash store unavailable: {:?}", err);
            None
        }
    };

    let tree = MenuTree::standard(&DEFAULT_TEMPLATES).unwrap();
    let panel_config = PanelConfig {
        mm_per_hole: MM_PER_HOLE,
        screensaver_after_ms: Some(SCREENSAVER_AFTER_MS),
    };
    let mut app = PanelApp::new(tree, keypad, panel_config);

    if let Some(store) = calibration_store.as_mut() {
        match store.load() {
            Ok(Some(position)) => {
                info!("calibration: restored position={} holes", position);
                app.restore_position(position);
            }
            Ok(None) => info!("calibration: no stored position"),
            Err(err) => info!("calibration: load failed: {:?}", err),
        }
    }

    let mut canvas = OledCanvas::new();
    let mut display_lit = true;

    info!(
        "Panel started: mm_per_hole={} step_period_us={} screensaver_ms={}",
        MM_PER_HOLE, STEP_PERIOD_US, SCREENSAVER_AFTER_MS
    );

    let loop_start = Instant::now();
    let mut sensor_fault_logged = false;
    let mut stepper_fault_logged = false;

    loop {
        let elapsed = loop_start.elapsed();
        let now_ms = elapsed.as_millis();

        let app_requests_render = app.tick(now_ms) == TickResult::RenderRequested;

        if let Err(err) = hole_sensor.poll(app.motion_mut())
            && !sensor_fault_logged
        {
            info!("hole sensor read failed: {:?}", err);
            sensor_fault_logged = true;
        }
        app.settle();

        if let Err(err) = stepper.service(app.motion_mut(), elapsed.as_micros())
            && !stepper_fault_logged
        {
            info!("stepper service failed: {:?}", err);
            stepper_fault_logged = true;
        }

        if app_requests_render {
            app.draw(&mut canvas);
            let panel_lit = app.render_gate() == RenderGate::Allowed;
            let result = match (panel_lit, display_lit) {
                (true, false) => display
                    .display_on()
                    .and_then(|()| display.flush_frame(canvas.frame())),
                (true, true) => display.flush_frame(canvas.frame()),
                // Screen saver: push the blank frame, then switch the panel off.
                (false, _) => display
                    .flush_frame(canvas.frame())
                    .and_then(|()| display.display_off()),
            };
            match result {
                Ok(()) => display_lit = panel_lit,
                Err(err) if !display_fault_logged => {
                    info!("display flush failed: {:?}", err);
                    display_fault_logged = true;
                }
                Err(_) => {}
            }
        }

        if let Some(position) = app.take_calibration_save() {
            match calibration_store.as_mut().map(|store| store.save(position)) {
                Some(Ok(())) => info!("calibration: saved position={} holes", position),
                Some(Err(err)) => info!("calibration: save failed: {:?}", err),
                None => info!("calibration: no store, position={} not persisted", position),
            }
        }

        Timer::after_micros(LOOP_PERIOD_US).await;
    }
}

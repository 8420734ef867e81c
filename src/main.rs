#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use avr_device::atmega1284p::{Peripherals, PORTA, PORTD};
    use avr_device::interrupt::{self, Mutex};
    use core::cell::RefCell;

    use tri_timer_leds::config::CPU_FREQ_HZ;
    use tri_timer_leds::diagnostics;
    use tri_timer_leds::drivers::{SerialConsole, SoftLed};
    use tri_timer_leds::hal::gpio::{board, Input, Pin};
    use tri_timer_leds::logger::Logger;
    use tri_timer_leds::rtos::{self, timers, Channel, HandlerAction, Settings, SCHEDULE};

    // Toggled from TIMER3_COMPA once the yellow handler asks for it
    static YELLOW_LED: Mutex<RefCell<Option<SoftLed<board::YellowLed>>>> =
        Mutex::new(RefCell::new(None));

    #[avr_device::entry]
    fn main() -> ! {
        let dp = Peripherals::take().unwrap();

        let mut log = Logger::new(SerialConsole::new(dp.USART0));
        log.info("Three-timer LEDs v0.1.0");

        let red_pin: board::RedLed = Pin::<PORTA, 0, Input>::new().into_output();
        let yellow_pin: board::YellowLed = Pin::<PORTA, 1, Input>::new().into_output();
        let mut red = SoftLed::new(red_pin).unwrap_or_else(|e| match e {});
        let yellow = SoftLed::new(yellow_pin).unwrap_or_else(|e| match e {});
        // OC1A only toggles the pin once it is an output
        let _green: board::GreenLed = Pin::<PORTD, 5, Input>::new().into_output();

        let (mut tc0, mut tc1, mut tc3) = (dp.TC0, dp.TC1, dp.TC3);
        let settings = Settings::default();
        let plan = match timers::start_timers(&mut tc0, &mut tc3, &mut tc1, &SCHEDULE, CPU_FREQ_HZ, &settings) {
            Ok(plan) => plan,
            Err(err) => {
                diagnostics::report_setup_error(&mut log, &err);
                panic!();
            }
        };
        diagnostics::report_plan(&mut log, &plan, CPU_FREQ_HZ);

        interrupt::free(|cs| {
            YELLOW_LED.borrow(cs).replace(Some(yellow));
        });

        // Enable interrupts globally
        unsafe { interrupt::enable() };
        log.info("Ready...");

        loop {
            if SCHEDULE.release_red.take() {
                red.toggle().unwrap_or_else(|e| match e {});
            }
        }
    }

    #[avr_device::interrupt(atmega1284p)]
    fn TIMER0_COMPA() {
        rtos::dispatch(&SCHEDULE, Channel::Red);
    }

    #[avr_device::interrupt(atmega1284p)]
    fn TIMER3_COMPA() {
        if rtos::dispatch(&SCHEDULE, Channel::Yellow) == HandlerAction::ToggleLed {
            interrupt::free(|cs| {
                if let Some(led) = YELLOW_LED.borrow(cs).borrow_mut().as_mut() {
                    led.toggle().unwrap_or_else(|e| match e {});
                }
            });
        }
    }

    #[avr_device::interrupt(atmega1284p)]
    fn TIMER1_COMPA() {
        // OC1A has already toggled; only the count is kept
        rtos::dispatch(&SCHEDULE, Channel::Green);
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}

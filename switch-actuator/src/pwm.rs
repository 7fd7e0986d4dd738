//! Servo sobre um canal PWM do `embedded-hal` 1.0
//!
//! O canal precisa estar configurado a 50 Hz (período de 20 ms). Attach e
//! detach ligam e desligam o pulso; com duty 0 o servo fica sem torque.

use embedded_hal::pwm::SetDutyCycle;
use switch_core::traits::{ServoDriver, SwitchComponent};
use switch_core::types::{Angle, Pin};

/// Período do PWM de servo (µs) a 50 Hz
pub const PERIOD_US: u32 = 20_000;

/// Servo real dirigido por um canal PWM.
pub struct PwmServo<P: SetDutyCycle> {
    channel: P,
    name: String,
    pin: Option<Pin>,
    commanded: Option<Angle>,
}

impl<P: SetDutyCycle> std::fmt::Debug for PwmServo<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PwmServo")
            .field("name", &self.name)
            .field("pin", &self.pin)
            .field("commanded", &self.commanded)
            .finish()
    }
}

impl<P: SetDutyCycle> PwmServo<P> {
    pub fn new(channel: P) -> Self {
        Self::named("pwm-servo", channel)
    }

    pub fn named(name: &str, channel: P) -> Self {
        Self {
            channel,
            name: name.to_string(),
            pin: None,
            commanded: None,
        }
    }

    /// Duty correspondente ao ângulo para o `max_duty` do canal
    pub fn duty_for(&self, angle: Angle) -> u16 {
        let max_duty = self.channel.max_duty_cycle() as u32;
        (angle.to_pulse_width_us() * max_duty / PERIOD_US) as u16
    }

    pub fn channel(&self) -> &P {
        &self.channel
    }

    /// Devolve o canal PWM
    pub fn release(self) -> P {
        self.channel
    }

    fn emit(&mut self, duty: u16) {
        if let Err(err) = self.channel.set_duty_cycle(duty) {
            tracing::warn!(servo = %self.name, duty, error = ?err, "PWM duty update failed");
        }
    }
}

impl<P: SetDutyCycle + Send> SwitchComponent for PwmServo<P> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<P: SetDutyCycle + Send> ServoDriver for PwmServo<P> {
    fn attach(&mut self, pin: Pin) {
        self.pin = Some(pin);
        if let Some(angle) = self.commanded {
            let duty = self.duty_for(angle);
            self.emit(duty);
        }
    }

    fn detach(&mut self) {
        self.pin = None;
        self.emit(0);
    }

    fn write(&mut self, angle: Angle) {
        self.commanded = Some(angle);
        if self.pin.is_some() {
            let duty = self.duty_for(angle);
            self.emit(duty);
        }
    }

    fn is_attached(&self) -> bool {
        self.pin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::pwm::{ErrorKind, ErrorType};

    /// Canal PWM falso de 16 bits
    #[derive(Debug, Default)]
    struct FakeChannel {
        duties: Vec<u16>,
        fail: bool,
    }

    #[derive(Debug)]
    struct FakeError;

    impl embedded_hal::pwm::Error for FakeError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for FakeChannel {
        type Error = FakeError;
    }

    impl SetDutyCycle for FakeChannel {
        fn max_duty_cycle(&self) -> u16 {
            20_000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail {
                return Err(FakeError);
            }
            self.duties.push(duty);
            Ok(())
        }
    }

    fn deg(d: i32) -> Angle {
        Angle::new(d).unwrap()
    }

    #[test]
    fn test_duty_matches_pulse_width() {
        let servo = PwmServo::new(FakeChannel::default());
        // max_duty == período em µs, então duty == largura de pulso
        assert_eq!(servo.duty_for(deg(0)), 500);
        assert_eq!(servo.duty_for(deg(90)), 1500);
        assert_eq!(servo.duty_for(deg(180)), 2500);
    }

    #[test]
    fn test_no_pulse_before_attach() {
        let mut servo = PwmServo::new(FakeChannel::default());
        servo.write(deg(90));
        assert!(servo.channel().duties.is_empty());

        servo.attach(Pin(6));
        assert_eq!(servo.channel().duties, vec![1500]);
    }

    #[test]
    fn test_write_and_detach() {
        let mut servo = PwmServo::new(FakeChannel::default());
        servo.attach(Pin(6));
        servo.write(deg(135));
        servo.detach();

        assert!(!servo.is_attached());
        let expected_top = deg(135).to_pulse_width_us() as u16;
        assert_eq!(servo.release().duties, vec![expected_top, 0]);
    }

    #[test]
    fn test_channel_errors_are_swallowed() {
        let channel = FakeChannel {
            fail: true,
            ..Default::default()
        };
        let mut servo = PwmServo::named("flaky", channel);
        servo.attach(Pin(6));
        servo.write(deg(49));
        servo.detach();
        assert!(!servo.is_attached());
    }
}

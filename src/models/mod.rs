mod appointment;
mod client;
mod dni;
mod record_id;

pub use appointment::{Appointment, AppointmentType, NewAppointment, Zone};
pub use client::Client;
pub use dni::{Dni, DNI_LENGTH};
pub use record_id::RecordId;

pub mod appointment;
pub mod department;
pub mod doctor;
pub mod enums;
pub mod medical_record;
pub mod patient;
pub mod payment;

pub use appointment::Appointment;
pub use department::Department;
pub use doctor::Doctor;
pub use medical_record::MedicalRecord;
pub use patient::Patient;
pub use payment::Payment;

pub mod hole;

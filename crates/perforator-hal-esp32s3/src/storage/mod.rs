pub mod flash_calibration;

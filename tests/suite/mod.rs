mod config;
mod otp_flow;
mod pin_flow;
mod teardown;

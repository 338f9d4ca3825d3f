mod scheduler;
mod traffic;

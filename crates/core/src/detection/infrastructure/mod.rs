pub mod pico_cascade;
pub mod pico_face_detector;

pub mod jpeg_face_renderer;
mod stroke;

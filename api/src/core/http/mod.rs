pub mod text_stream;

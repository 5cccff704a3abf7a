pub mod fixture_loader;

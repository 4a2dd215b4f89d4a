pub mod landing_route;

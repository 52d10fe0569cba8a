use media::config::MediaSettings;
use media::{MediaError, NewPicture, PictureRepository, UrlOptions};

use crate::common::{BASE_URL, TestMedia, dimensions, png};

mod insert {
    use super::*;

    #[tokio::test]
    async fn original_is_written_to_slot_zero() {
        let app = TestMedia::spawn().await;
        let data = png(40, 30);

        let picture = app
            .service
            .insert_picture(NewPicture::new(data.clone(), "image/x-png"))
            .await
            .unwrap();

        assert_eq!(picture.id, 1);
        assert!(picture.binary.is_empty());
        assert_eq!(std::fs::read(app.path("images/0000001_0.png")).unwrap(), data);
        assert_eq!(app.service.load_picture_binary(&picture).await.unwrap(), data);
    }

    #[tokio::test]
    async fn oversized_upload_is_shrunk() {
        let app = TestMedia::with_settings(MediaSettings {
            maximum_image_size: 100,
            ..MediaSettings::default()
        })
        .await;

        let picture = app
            .service
            .insert_picture(NewPicture::new(png(400, 200), "image/png"))
            .await
            .unwrap();

        let stored = app.service.load_picture_binary(&picture).await.unwrap();
        assert_eq!(dimensions(&stored), (100, 50));
    }

    #[tokio::test]
    async fn corrupt_upload_is_rejected_when_validated() {
        let app = TestMedia::spawn().await;

        let err = app
            .service
            .insert_picture(NewPicture::new(b"not an image".to_vec(), "image/png"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Image(_)));
        assert!(app.pictures.is_empty().await);
    }
}

mod urls {
    use super::*;

    #[tokio::test]
    async fn thumbnail_is_generated_once_and_reused() {
        let app = TestMedia::spawn().await;
        let picture = app
            .service
            .insert_picture(NewPicture::new(png(300, 600), "image/png").seo_filename("red-shoe"))
            .await
            .unwrap();

        let url = app
            .service
            .picture_url(Some(&picture), UrlOptions::sized(100))
            .await;
        assert_eq!(url, format!("{BASE_URL}/images/thumbs/0000001_red-shoe_100.png"));

        let thumb_path = app.path("images/thumbs/0000001_red-shoe_100.png");
        assert_eq!(dimensions(&std::fs::read(&thumb_path).unwrap()), (50, 100));

        // A second request must not regenerate: overwrite the file with a
        // marker and check it survives.
        std::fs::write(&thumb_path, b"marker").unwrap();
        let again = app
            .service
            .picture_url(Some(&picture), UrlOptions::sized(100))
            .await;
        assert_eq!(again, url);
        assert_eq!(std::fs::read(&thumb_path).unwrap(), b"marker");
    }

    #[tokio::test]
    async fn target_zero_copies_original_verbatim() {
        let app = TestMedia::spawn().await;
        let data = png(64, 64);
        let picture = app
            .service
            .insert_picture(NewPicture::new(data.clone(), "image/png"))
            .await
            .unwrap();

        let url = app.service.picture_url(Some(&picture), UrlOptions::default()).await;

        assert_eq!(url, format!("{BASE_URL}/images/thumbs/0000001.png"));
        assert_eq!(std::fs::read(app.path("images/thumbs/0000001.png")).unwrap(), data);
    }

    #[tokio::test]
    async fn lookup_by_id() {
        let app = TestMedia::spawn().await;
        let picture = app
            .service
            .insert_picture(NewPicture::new(png(20, 20), "image/png"))
            .await
            .unwrap();

        let url = app
            .service
            .picture_url_by_id(picture.id, UrlOptions::sized(10))
            .await;
        assert_eq!(url, format!("{BASE_URL}/images/thumbs/0000001_10.png"));
        assert_eq!(
            app.service
                .try_picture_url_by_id(999, UrlOptions::sized(10).without_default())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn corrupt_stored_original_yields_empty_url() {
        let app = TestMedia::spawn().await;
        let mut new = NewPicture::new(b"garbage".to_vec(), "image/png");
        new.validate_binary = false;
        let picture = app.service.insert_picture(new).await.unwrap();

        let err = app
            .service
            .try_picture_url(Some(&picture), UrlOptions::sized(100))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Image(_)));
        assert_eq!(
            app.service.picture_url(Some(&picture), UrlOptions::sized(100)).await,
            ""
        );
        assert!(app.thumb_files().is_empty());
    }

    #[tokio::test]
    async fn sharded_thumbnails_use_stem_prefix_directory() {
        let app = TestMedia::with_settings(MediaSettings {
            multiple_thumb_directories: true,
            ..MediaSettings::default()
        })
        .await;
        let picture = app
            .service
            .insert_picture(NewPicture::new(png(50, 50), "image/png"))
            .await
            .unwrap();

        let url = app
            .service
            .picture_url(Some(&picture), UrlOptions::sized(20))
            .await;

        assert_eq!(url, format!("{BASE_URL}/images/thumbs/000/0000001_20.png"));
        assert!(app.path("images/thumbs/000/0000001_20.png").exists());
    }

    #[tokio::test]
    async fn cdn_replaces_backend_root() {
        let app = TestMedia::with_settings(MediaSettings {
            enable_cdn: true,
            cdn_base_url: "https://cdn.example.com/".into(),
            ..MediaSettings::default()
        })
        .await;
        let picture = app
            .service
            .insert_picture(NewPicture::new(png(50, 50), "image/png"))
            .await
            .unwrap();

        let url = app
            .service
            .picture_url(Some(&picture), UrlOptions::sized(20))
            .await;
        assert_eq!(url, "https://cdn.example.com/images/thumbs/0000001_20.png");
    }
}

mod store_in_db {
    use super::*;

    #[tokio::test]
    async fn thumbnails_come_from_record_binary() {
        let app = TestMedia::with_settings(MediaSettings {
            store_in_db: true,
            ..MediaSettings::default()
        })
        .await;
        let picture = app
            .service
            .insert_picture(NewPicture::new(png(80, 40), "image/png"))
            .await
            .unwrap();
        assert!(!app.path("images/0000001_0.png").exists());

        let url = app
            .service
            .picture_url(Some(&picture), UrlOptions::sized(40))
            .await;
        assert_eq!(url, format!("{BASE_URL}/images/thumbs/0000001_40.png"));

        let stored = app.pictures.get(picture.id).await.unwrap().unwrap();
        assert_eq!(stored.binary, picture.binary);
    }
}
